pub mod extra_payment;
pub mod schedule;
