// self
use crate::{_prelude::*, obs::Call};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// Emits a `debug` event when tracing is enabled; compiles to nothing otherwise.
macro_rules! debug_event {
	($($arg:tt)*) => {
		#[cfg(feature = "tracing")]
		{
			::tracing::debug!($($arg)*);
		}
	};
}
pub(crate) use debug_event;

/// A span builder used by broker calls.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the call and, when known, the instance identifier.
	pub fn new(call: Call, instance_id: Option<&str>) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"service_broker.call",
				call = call.as_str(),
				instance_id = tracing::field::Empty
			);

			if let Some(id) = instance_id {
				span.record("instance_id", id);
			}

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (call, instance_id);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}
