/// Marker for view state.
///
/// A state holds everything needed to render its view and nothing that
/// is not derived from the cache or from user input.
pub trait UiState: Clone + PartialEq + Default + Send + 'static {}
