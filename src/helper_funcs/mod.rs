pub mod build_rec_batch;
pub mod flatten;
