pub mod public_env;
pub mod styles;

pub use public_env::public_env_script;
pub use styles::{
    inject_styles, render_critical_styles, render_style_tags, StyleCache, StyleChunk, StyleSheet,
};
