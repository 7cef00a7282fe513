pub mod delivery_api;
