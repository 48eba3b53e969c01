pub mod claims_controller;
