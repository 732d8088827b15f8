//! Fixed-field text templates for describe output

use crate::error::Result;
use serde::Serialize;
use std::io::Write;
use tera::{Context, Tera};

/// Render `template` with the fields of `value` and write it to `out`
pub fn render_template<W, T>(out: &mut W, name: &str, template: &str, value: &T) -> Result<()>
where
    W: Write + ?Sized,
    T: Serialize,
{
    let mut tera = Tera::default();
    tera.add_raw_template(name, template)?;

    let context = Context::from_serialize(value)?;
    let text = tera.render(name, &context)?;
    out.write_all(text.as_bytes())?;
    Ok(())
}
