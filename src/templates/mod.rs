pub(crate) mod presets;
