mod helpers;
mod passport;
mod role;
