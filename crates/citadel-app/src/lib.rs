//! HTTP surface of the admin back office: dependency hoops, the access
//! guard, the route table and the `{code, message, data}` handlers.

pub mod app;
pub mod db_handler;
pub mod error;
pub mod middleware;
