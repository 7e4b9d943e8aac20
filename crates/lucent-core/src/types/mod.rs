pub mod beacon;
pub mod update;
