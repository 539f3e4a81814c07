// Interface adapters: service clients, wire DTOs and the terminal front end.

pub mod clients;
pub mod identity;
pub mod protocol;
pub mod state;
pub mod terminal;
