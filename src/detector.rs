pub mod annotate;
pub mod impl_fake;
pub mod impl_tract_onnx;
pub mod interface;
pub mod postprocess;
pub mod tract;
