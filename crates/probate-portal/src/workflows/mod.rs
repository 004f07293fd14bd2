pub mod advancement;
