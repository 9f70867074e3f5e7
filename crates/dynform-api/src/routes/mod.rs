//! # API Route Modules
//!
//! | Prefix          | Module            |
//! |-----------------|-------------------|
//! | `/forms/*`      | [`forms`]         |
//! | `/submissions`  | [`submissions`]   |
//! | `/statistics`   | [`statistics`]    |

pub mod forms;
pub mod statistics;
pub mod submissions;
