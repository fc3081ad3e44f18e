pub mod balls;
pub mod pocket;
pub mod rack;
pub mod session;
pub mod settle;
pub mod shot;
pub mod special;
pub mod table;
