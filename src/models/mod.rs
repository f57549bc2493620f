mod message;
mod metric;

pub use message::InboundMessage;
pub use metric::{Metric, MetricSnapshot, Rating, Source};
