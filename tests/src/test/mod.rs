mod admin;
mod load;
mod sync;
mod vote;
