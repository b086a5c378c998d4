//! Point to point signals between models.

use std::fmt;

type Sink<T> = Box<dyn FnMut(T) + Send>;

/// Driving end of a wire. Values synced on an unbound wire are dropped.
pub struct WireMaster<T> {
    sink: Option<Sink<T>>,
}

impl<T> WireMaster<T> {
    pub fn new() -> Self {
        Self { sink: None }
    }

    pub fn bind(&mut self, sink: impl FnMut(T) + Send + 'static) {
        self.sink = Some(Box::new(sink));
    }

    pub fn is_bound(&self) -> bool {
        self.sink.is_some()
    }

    pub fn sync(&mut self, value: T) {
        if let Some(sink) = self.sink.as_mut() {
            sink(value);
        }
    }
}

impl<T> Default for WireMaster<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for WireMaster<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WireMaster").field("bound", &self.is_bound()).finish()
    }
}
