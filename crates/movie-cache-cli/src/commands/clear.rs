use super::context::AppContext;
use crate::output::Output;
use color_eyre::Result;

pub async fn run_clear(ctx: &AppContext, output: &Output) -> Result<()> {
    let repository = ctx.local_repository()?;
    let removed = repository.clear()?;

    if removed == 0 {
        output.info("Movie store is already empty");
    } else {
        output.success(format!("Removed {} movie record(s), favorites included", removed));
    }
    Ok(())
}
