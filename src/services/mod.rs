pub mod activity;
pub mod providers;
pub mod recommendations;
pub mod recommender;
