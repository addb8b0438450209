//! Accept-header negotiation
//!
//! A deliberately small best-match policy rather than a full RFC 7231
//! implementation. Given the MIME patterns offered by the routes that matched
//! a request and the client's `Accept` header, [`best_match`] picks one
//! offered pattern or reports that none is acceptable.
//!
//! ## Ranking
//!
//! Every offered pattern is scored against the header's media ranges. A range
//! is compatible when the top-level types are equal (or either is `*`) and the
//! subtypes are equal (or either is `*`). The compatible range with the highest
//! fitness gives the offered pattern its score:
//!
//! | component            | points |
//! |----------------------|--------|
//! | same top-level type  | 100    |
//! | same subtype         | 10     |
//! | each equal parameter | 1      |
//!
//! so an exact match beats `type/*`, which beats `*/*`. Candidates are then
//! ranked by the range's `q` weight, then fitness, then their position in the
//! offered list (earlier wins). A best candidate with `q=0` is not acceptable.

use smallvec::SmallVec;

/// String form of "no acceptable type", for callers that want a sentinel
/// rather than `Option`.
pub const NO_MIME_TYPE: &str = "";

/// Wildcard range used for an empty or missing `Accept` header.
pub const ANY_MIME_TYPE: &str = "*/*";

const TYPE_POINTS: u32 = 100;
const SUBTYPE_POINTS: u32 = 10;

/// A parsed MIME type or media range (`type/subtype;k=v;q=0.5`).
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange<'a> {
    /// Top-level type, e.g. `text`
    pub main: &'a str,
    /// Subtype, e.g. `html`
    pub sub: &'a str,
    /// Parameters other than `q`
    pub params: SmallVec<[(&'a str, &'a str); 4]>,
    /// The `q` weight, 1.0 when absent or not a number in `0..=1`
    pub quality: f32,
}

impl<'a> MediaRange<'a> {
    /// Parse one media range. A bare `*` is read as `*/*`.
    ///
    /// Returns `None` for text without a `/` or with an empty half.
    #[must_use]
    pub fn parse(text: &'a str) -> Option<Self> {
        let mut parts = text.split(';');
        let full = parts.next()?.trim();
        let (main, sub) = if full == "*" {
            ("*", "*")
        } else {
            let (main, sub) = full.split_once('/')?;
            (main.trim(), sub.trim())
        };
        if main.is_empty() || sub.is_empty() {
            return None;
        }

        let mut params = SmallVec::new();
        let mut quality = 1.0_f32;
        for param in parts {
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            if key.eq_ignore_ascii_case("q") {
                quality = value
                    .parse::<f32>()
                    .ok()
                    .filter(|q| (0.0..=1.0).contains(q))
                    .unwrap_or(1.0);
            } else {
                params.push((key, value));
            }
        }

        Some(Self {
            main,
            sub,
            params,
            quality,
        })
    }

    /// Fitness of `self` (an offered type) against `range`, or `None` when
    /// the two are incompatible.
    #[must_use]
    pub fn fitness(&self, range: &MediaRange<'_>) -> Option<u32> {
        let same_main = self.main.eq_ignore_ascii_case(range.main);
        let same_sub = self.sub.eq_ignore_ascii_case(range.sub);
        let main_ok = same_main || self.main == "*" || range.main == "*";
        let sub_ok = same_sub || self.sub == "*" || range.sub == "*";
        if !(main_ok && sub_ok) {
            return None;
        }

        let mut fitness = 0;
        if same_main {
            fitness += TYPE_POINTS;
        }
        if same_sub {
            fitness += SUBTYPE_POINTS;
        }
        let param_hits = self
            .params
            .iter()
            .filter(|(k, v)| {
                range
                    .params
                    .iter()
                    .any(|(rk, rv)| rk.eq_ignore_ascii_case(k) && rv == v)
            })
            .count();
        Some(fitness + param_hits as u32)
    }
}

fn parse_header(header: &str) -> SmallVec<[MediaRange<'_>; 8]> {
    let header = header.trim();
    let header = if header.is_empty() { ANY_MIME_TYPE } else { header };
    header.split(',').filter_map(MediaRange::parse).collect()
}

/// Best (quality, fitness) of `offered` over the parsed header ranges.
/// Earlier ranges win fitness ties.
fn score(offered: &MediaRange<'_>, ranges: &[MediaRange<'_>]) -> Option<(f32, u32)> {
    let mut best: Option<(u32, f32)> = None;
    for range in ranges {
        if let Some(fitness) = offered.fitness(range) {
            if best.map_or(true, |(f, _)| fitness > f) {
                best = Some((fitness, range.quality));
            }
        }
    }
    best.map(|(fitness, quality)| (quality, fitness))
}

/// Pick the offered MIME pattern that best satisfies `header`.
///
/// `offered` is expected in registration order; ties go to the earlier entry.
/// Offered patterns that do not parse are skipped.
///
/// # Example
///
/// ```rust
/// use routecore::router::mime::best_match;
///
/// let offered = ["text/*", "text/html"];
/// assert_eq!(best_match(&offered, "text/html"), Some("text/html"));
/// assert_eq!(best_match(&offered, "application/json"), None);
/// ```
#[must_use]
pub fn best_match<'o, S: AsRef<str>>(offered: &'o [S], header: &str) -> Option<&'o str> {
    let ranges = parse_header(header);
    let mut best: Option<(f32, u32, &'o str)> = None;

    for candidate in offered {
        let text = candidate.as_ref();
        let Some(parsed) = MediaRange::parse(text) else {
            continue;
        };
        let Some((quality, fitness)) = score(&parsed, &ranges) else {
            continue;
        };
        let better = best.map_or(true, |(bq, bf, _)| {
            quality > bq || (quality == bq && fitness > bf)
        });
        if better {
            best = Some((quality, fitness, text));
        }
    }

    best.filter(|(quality, _, _)| *quality > 0.0)
        .map(|(_, _, text)| text)
}

/// Like [`best_match`] but returns [`NO_MIME_TYPE`] instead of `None`.
#[must_use]
pub fn best_match_or_sentinel<'o, S: AsRef<str>>(offered: &'o [S], header: &str) -> &'o str {
    best_match(offered, header).unwrap_or(NO_MIME_TYPE)
}

/// `true` when a single offered pattern is acceptable for `header`.
#[must_use]
pub fn is_acceptable(offered: &str, header: &str) -> bool {
    best_match(&[offered], header).is_some()
}
