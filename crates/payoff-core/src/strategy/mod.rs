pub mod compare;
pub mod ordering;
pub mod planner;
