pub mod composite;
pub mod gmm;
pub mod grab_cut;
pub mod label;
pub mod max_flow;
pub mod pipeline;
pub mod post_process;
pub mod seed;
