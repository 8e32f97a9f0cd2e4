use std::sync::Arc;

use async_trait::async_trait;
use pod_handler::AsyncHandler;
use pod_http::matches_media_type;
use pod_types::{Diagnostics, HttpError, HttpResult, Representation, RepresentationPreferences, WeightedTypes};
use tracing::{debug, warn};

use crate::converter::{check_typed, join_types, ConverterArgs, TypedConverter};

/// Runs a fixed sequence of converters as one.
///
/// For every adjacent pair the intermediate media type is the one maximising
/// `output weight (left) x input weight (right)` over compatible pairs. Each
/// intermediate step is asked for exactly that type; only the last converter
/// sees the caller's preferences.
pub struct ChainedConverter {
    converters: Vec<Arc<dyn TypedConverter>>,
    diagnostics: Diagnostics,
}

impl ChainedConverter {
    /// Fails unless at least two converters are given.
    pub fn new(converters: Vec<Arc<dyn TypedConverter>>) -> HttpResult<Self> {
        if converters.len() < 2 {
            return Err(HttpError::internal("At least 2 converters are required."));
        }
        Ok(Self {
            converters,
            diagnostics: Diagnostics::current(),
        })
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    fn first(&self) -> &dyn TypedConverter {
        self.converters[0].as_ref()
    }

    fn last(&self) -> &dyn TypedConverter {
        self.converters[self.converters.len() - 1].as_ref()
    }

    /// The best media type for `left` to produce and `right` to consume.
    ///
    /// Output types are tried in declaration order and skipped once their
    /// weight cannot beat the current best; a perfect product of 1 ends the
    /// search immediately.
    pub fn matching_type(
        &self,
        left: &dyn TypedConverter,
        right: &dyn TypedConverter,
    ) -> HttpResult<String> {
        let outputs = left.output_types();
        let inputs = right.input_types();
        let mut best: Option<(&str, f64)> = None;

        for (output, out_weight) in outputs.iter() {
            let best_weight = best.map_or(0.0, |(_, w)| w);
            if out_weight <= best_weight {
                continue;
            }
            for (input, in_weight) in inputs.iter() {
                let weight = out_weight * in_weight;
                if weight > best.map_or(0.0, |(_, w)| w) && matches_media_type(input, output) {
                    best = Some((output, weight));
                    if weight == 1.0 {
                        self.diagnostics.in_scope(|| {
                            debug!(
                                "{output} is an exact match between {} and {}",
                                join_types(&outputs),
                                join_types(&inputs)
                            )
                        });
                        return Ok(output.to_string());
                    }
                }
            }
        }

        match best {
            Some((output, _)) => {
                self.diagnostics.in_scope(|| {
                    debug!(
                        "{output} is the best match between {} and {}",
                        join_types(&outputs),
                        join_types(&inputs)
                    )
                });
                Ok(output.to_string())
            }
            None => {
                let message = format!(
                    "No match found between {} and {}",
                    join_types(&outputs),
                    join_types(&inputs)
                );
                self.diagnostics.in_scope(|| warn!("{message}"));
                Err(HttpError::Internal(message))
            }
        }
    }
}

#[async_trait]
impl AsyncHandler<ConverterArgs, Representation> for ChainedConverter {
    fn name(&self) -> &str {
        "chained converter"
    }

    async fn can_handle(&self, args: &ConverterArgs) -> HttpResult<()> {
        check_typed(self, args)
    }

    async fn handle(&self, args: ConverterArgs) -> HttpResult<Representation> {
        let ConverterArgs {
            identifier,
            mut representation,
            preferences,
        } = args;

        for pair in self.converters.windows(2) {
            let (left, right) = (pair[0].as_ref(), pair[1].as_ref());
            let intermediate = self.matching_type(left, right)?;
            representation = left
                .handle(ConverterArgs {
                    identifier: identifier.clone(),
                    representation,
                    preferences: RepresentationPreferences::for_type(intermediate),
                })
                .await?;
        }

        self.last()
            .handle(ConverterArgs {
                identifier,
                representation,
                preferences,
            })
            .await
    }
}

impl TypedConverter for ChainedConverter {
    fn input_types(&self) -> WeightedTypes {
        self.first().input_types()
    }

    fn output_types(&self) -> WeightedTypes {
        self.last().output_types()
    }
}
