//! Poem listing with on-disk fallback

use tracing::{error, instrument, warn};

use crate::data::{CoreError, PoemListing, TraceContext};
use crate::services::fallback::FallbackPoemSource;
use crate::services::pagination::Page;
use crate::services::query::GraphQueryGateway;

/// Serves `GET /poems`: the graph store first, the fallback snapshot when the
/// store fails.
#[derive(Clone)]
pub struct PoemCatalog {
    gateway: GraphQueryGateway,
    fallback: FallbackPoemSource,
}

impl PoemCatalog {
    pub fn new(gateway: GraphQueryGateway, fallback: FallbackPoemSource) -> Self {
        Self { gateway, fallback }
    }

    pub fn fallback(&self) -> &FallbackPoemSource {
        &self.fallback
    }

    /// Lists poems for one page.
    ///
    /// Only store failures trigger the fallback. When the fallback has no
    /// records, or its directory cannot be read, the store error is returned.
    #[instrument(skip(self, trace_ctx), fields(trace_id = %trace_ctx.trace_id))]
    pub async fn list(
        &self,
        trace_ctx: &TraceContext,
        search: Option<&str>,
        page: Page,
    ) -> Result<PoemListing, CoreError> {
        let upstream = match self.gateway.poems(trace_ctx, search, page).await {
            Ok(poems) => return Ok(PoemListing::page(poems, page.limit, page.skip)),
            Err(e) if e.is_upstream() => e,
            Err(e) => return Err(e),
        };

        warn!(
            "Poem query failed ({}), reading fallback poems from {}",
            upstream,
            self.fallback.dir().display()
        );
        match self.fallback.load(&trace_ctx.new_child()).await {
            Ok(mut poems) if !poems.is_empty() => {
                let count = poems.len();
                poems.truncate(usize::try_from(page.limit).unwrap_or(usize::MAX));
                Ok(PoemListing::fallback(poems, count))
            }
            Ok(_) => {
                error!("Fallback directory holds no poems");
                Err(upstream)
            }
            Err(e) => {
                error!("Fallback unavailable: {}", e);
                Err(upstream)
            }
        }
    }
}
