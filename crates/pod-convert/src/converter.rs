use pod_handler::AsyncHandler;
use pod_http::{matches_media_type, supports};
use pod_types::{HttpError, HttpResult, Representation, RepresentationPreferences, ResourceIdentifier, WeightedTypes};

/// Input to every converter.
#[derive(Debug)]
pub struct ConverterArgs {
    /// Identifier of the resource being converted; used as base IRI.
    pub identifier: ResourceIdentifier,
    pub representation: Representation,
    /// What the caller wants back.
    pub preferences: RepresentationPreferences,
}

impl ConverterArgs {
    pub fn new(
        identifier: ResourceIdentifier,
        representation: Representation,
        preferences: RepresentationPreferences,
    ) -> Self {
        Self {
            identifier,
            representation,
            preferences,
        }
    }
}

/// A representation converter as stored in composites.
pub type RepresentationConverter = dyn AsyncHandler<ConverterArgs, Representation>;

/// A converter that declares the media types it reads and writes, each with a
/// weight in `[0, 1]`.
pub trait TypedConverter: AsyncHandler<ConverterArgs, Representation> {
    fn input_types(&self) -> WeightedTypes;
    fn output_types(&self) -> WeightedTypes;
}

/// The `can_handle` check shared by typed converters: the incoming content
/// type must be one of the inputs and the preferences must accept one of the
/// outputs.
pub fn check_typed(converter: &dyn TypedConverter, args: &ConverterArgs) -> HttpResult<()> {
    let Some(content_type) = args.representation.content_type() else {
        return Err(HttpError::UnsupportedMediaType(format!(
            "{}: representation has no content type",
            converter.name()
        )));
    };
    let inputs = converter.input_types();
    let accepted = inputs
        .iter()
        .any(|(range, weight)| weight > 0.0 && matches_media_type(range, content_type));
    if !accepted {
        return Err(HttpError::UnsupportedMediaType(format!(
            "{} can only convert from {}, not {content_type}",
            converter.name(),
            join_types(&inputs)
        )));
    }
    let outputs = converter.output_types();
    if !supports(&args.preferences.media_types, &outputs) {
        return Err(HttpError::UnsupportedMediaType(format!(
            "{} can only convert to {}, not {}",
            converter.name(),
            join_types(&outputs),
            join_types(&args.preferences.media_types)
        )));
    }
    Ok(())
}

/// `a, b, c` rendering of a type map's keys.
pub fn join_types(types: &WeightedTypes) -> String {
    types.keys().collect::<Vec<_>>().join(", ")
}
