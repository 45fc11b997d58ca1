//! # DP Tools
//!
//! A collection of small, independent everyday tools: image re-encoding
//! (compress / convert / resize), calculators, unit converters, text
//! transformers, a password generator, a spin wheel, a thin admin sign-up
//! flow, and remote "AI flow" converters for exotic file formats.
//!
//! # Architecture: One Shared Pipeline, Many Pure Functions
//!
//! The only stateful-looking work is image re-encoding, and it runs through a
//! single parameterized routine:
//!
//! ```text
//! 1. Accept    name + declared MIME  →  ok / rejected   (no content sniffing)
//! 2. Decode    bytes                 →  bitmap          (natural width/height)
//! 3. Draw      bitmap                →  surface         (1:1, or resized)
//! 4. Encode    surface + params      →  data URI + byte size
//! ```
//!
//! The result is a pure function of `(source, params)`: nothing is cached,
//! and changing a control simply re-runs steps 3-4 on the decoded source.
//!
//! Everything else (BMI, loan, percentages, units, text) is input → formula
//! → output with no state at all.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Accept-list, decode, draw, re-encode; the [`imaging::RasterBackend`] seam |
//! | [`batch`] | Parallel re-encode of many files with rayon |
//! | [`data_uri`] | `data:<mime>;base64,<payload>` values and their decoded size |
//! | [`conversion`] | Remote conversion flows behind one [`conversion::ConversionService`] trait |
//! | [`calculators`] | BMI, loan, percentage, discount, tip, unit conversion |
//! | [`text`] | Case transforms and word/line/sentence counts |
//! | [`password`] | Password generator over selectable character classes |
//! | [`spin_wheel`] | Uniform pick from a list of segments |
//! | [`admin`] | Sign-up / sign-in against an [`admin::AuthBackend`] |
//! | [`config`] | `dp-tools.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting, pure `format_*` functions |
//!
//! # Design Decisions
//!
//! ## Failures Are Values
//!
//! A decode or encode that goes wrong returns an error the caller must handle;
//! it never degrades into "nothing happened". Unsupported files are rejected
//! before a single byte is decoded.
//!
//! ## Calculators Never Raise
//!
//! Malformed numeric input means "no result". Parsing returns `Option`, the
//! formulas return `Option` for degenerate input (zero height, zero term), and
//! the CLI prints nothing in that case.
//!
//! ## Exotic Formats Stay Remote
//!
//! DWG, DjVu, HEIC and friends are not decoded locally. Each converter is one
//! [`conversion::Flow`] variant sent to an opaque service; the crate checks the
//! accept-list, ships the bytes, and hands back whatever comes out. Fidelity
//! of those conversions cannot be verified here.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate for every codec, including
//! AVIF through `rav1e`. No system libraries, no external binaries.

pub mod admin;
pub mod batch;
pub mod calculators;
pub mod config;
pub mod conversion;
pub mod data_uri;
pub mod imaging;
pub mod output;
pub mod password;
pub mod spin_wheel;
pub mod text;

#[cfg(test)]
pub(crate) mod test_helpers;
