//! Test-only crate. The end-to-end flows live under `tests/`.
