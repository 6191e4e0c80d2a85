use super::Context;
use crate::output::render;
use anyhow::Result;
use clap::Args;
use larder_core::knowledge::suggest;

#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Start of an ingredient name. Omit to list every known ingredient.
    #[arg(default_value = "")]
    pub prefix: String,
}

pub fn run_suggest(args: &SuggestArgs, ctx: &Context) -> Result<()> {
    let names = suggest(&args.prefix);
    render(ctx.output, &names, |names, w| {
        for name in names {
            writeln!(w, "{name}")?;
        }
        Ok(())
    })
}
