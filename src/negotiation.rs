//! Content negotiation against the `Accept` header.

use std::str::FromStr;
use std::sync::Arc;

use http::header::ACCEPT;
use mime::Mime;

use crate::request::Request;

/// Picks the best of `priorities` for an `Accept` header value.
pub trait Negotiator: Send + Sync + 'static {
    /// Returns the chosen entry of `priorities`, or `None` when the client
    /// accepts none of them.
    fn best(&self, accept: &str, priorities: &[&str]) -> Option<String>;
}

/// Media-range negotiation with `q` weights and `*` wildcards.
///
/// Each candidate takes the weight of the most specific range that covers
/// it. Among candidates of equal weight, the one whose range appears first
/// in the header wins, then the one listed first in `priorities`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MediaTypeNegotiator;

struct MediaRange {
    mime: Mime,
    q: f32,
}

impl MediaRange {
    fn parse(header: &str) -> Vec<Self> {
        header
            .split(',')
            .filter_map(|part| Mime::from_str(part.trim()).ok())
            .map(|mime| {
                let q = match mime.get_param("q") {
                    None => 1.0,
                    // a malformed weight makes the range unacceptable
                    Some(q) => q
                        .as_str()
                        .parse::<f32>()
                        .ok()
                        .filter(|q| q.is_finite())
                        .map_or(0.0, |q| q.clamp(0.0, 1.0)),
                };
                Self { mime, q }
            })
            .collect()
    }

    /// 2 for an exact match, 1 for `type/*`, 0 for `*/*`.
    fn specificity(&self, candidate: &Mime) -> Option<u8> {
        if self.mime.type_() == mime::STAR && self.mime.subtype() == mime::STAR {
            return Some(0);
        }
        if self.mime.type_() != candidate.type_() {
            return None;
        }
        if self.mime.subtype() == mime::STAR {
            Some(1)
        } else if self.mime.subtype() == candidate.subtype() {
            Some(2)
        } else {
            None
        }
    }
}

impl Negotiator for MediaTypeNegotiator {
    fn best(&self, accept: &str, priorities: &[&str]) -> Option<String> {
        let ranges = MediaRange::parse(accept);

        // (q, header position, priority position) of the current winner
        let mut best: Option<(f32, usize, usize)> = None;

        for (p_index, priority) in priorities.iter().enumerate() {
            let Ok(candidate) = Mime::from_str(priority) else {
                continue;
            };

            let covering = ranges
                .iter()
                .enumerate()
                .filter_map(|(h_index, range)| {
                    range.specificity(&candidate).map(|s| (s, h_index, range.q))
                })
                // most specific first, earliest in the header on ties
                .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

            let Some((_, h_index, q)) = covering else {
                continue;
            };
            if q <= 0.0 {
                continue;
            }

            let better = match best {
                None => true,
                Some((best_q, best_h, _)) => q > best_q || (q == best_q && h_index < best_h),
            };
            if better {
                best = Some((q, h_index, p_index));
            }
        }

        best.map(|(_, _, p_index)| priorities[p_index].to_owned())
    }
}

/// Applies a [`Negotiator`] to requests.
#[derive(Clone)]
pub struct ContentNegotiationManager {
    negotiator: Arc<dyn Negotiator>,
}

impl ContentNegotiationManager {
    pub fn new(negotiator: Arc<dyn Negotiator>) -> Self {
        Self { negotiator }
    }

    /// Best of `priorities` for the request, or `None` when it carries no
    /// `Accept` header at all.
    pub fn best_match(&self, request: &Request, priorities: &[&str]) -> Option<String> {
        let accept = request.header_line(ACCEPT.as_str())?;
        self.negotiator.best(&accept, priorities)
    }
}

impl Default for ContentNegotiationManager {
    fn default() -> Self {
        Self::new(Arc::new(MediaTypeNegotiator))
    }
}
