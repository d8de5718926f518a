pub mod background_subtractor;
