//! Domain types and pure logic of the survey service.
//!
//! Nothing in this crate touches the database or the network; the server
//! crate loads rows and hands them to the functions defined here.

pub mod domain;
