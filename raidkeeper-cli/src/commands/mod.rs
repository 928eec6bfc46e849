pub mod counters;
pub mod layout;
pub mod run;
