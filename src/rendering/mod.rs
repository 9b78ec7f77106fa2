pub mod segment;
pub mod sink;

pub use segment::{OverlapPlan, PageTag, Segment, Segmenter};
pub use sink::{encode_png, sink_for, Artifact, NamedPage, PageSink, PngSink, XtcSink};
