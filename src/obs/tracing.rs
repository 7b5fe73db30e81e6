// self
use crate::{_prelude::*, obs::FlowKind};

#[cfg(feature = "tracing")]
/// Future wrapped in the flow span.
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
#[cfg(not(feature = "tracing"))]
/// Future returned untouched when the `tracing` feature is off.
pub type InstrumentedFlow<F> = F;

/// `oauth2_thecity.flow` span carrying the flow kind, call site, and the provider's HTTP
/// status once known.
///
/// Compiles down to a zero-sized value without the `tracing` feature.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Opens a span for `kind` at `stage`.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(not(feature = "tracing"))]
		let _ = (kind, stage);

		Self {
			#[cfg(feature = "tracing")]
			span: tracing::info_span!(
				"oauth2_thecity.flow",
				flow = kind.as_str(),
				stage,
				status = tracing::field::Empty
			),
		}
	}

	/// Records the HTTP status the provider answered with.
	pub fn record_status(&self, status: u16) {
		#[cfg(feature = "tracing")]
		self.span.record("status", status);
		#[cfg(not(feature = "tracing"))]
		let _ = status;
	}

	/// Enters the span for a synchronous section.
	pub fn entered(self) -> FlowSpanGuard {
		FlowSpanGuard {
			#[cfg(feature = "tracing")]
			_guard: self.span.entered(),
		}
	}

	/// Attaches the span to `fut` so no guard is held across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			tracing::Instrument::instrument(fut, self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Guard returned by [`FlowSpan::entered`]; the span closes when it drops.
pub struct FlowSpanGuard {
	#[cfg(feature = "tracing")]
	_guard: tracing::span::EnteredSpan,
}
impl Debug for FlowSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("FlowSpanGuard(..)")
	}
}
