use tracing::info;

use crate::cli::ResponderArgs;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::responder;
use crate::session::Session;

pub async fn run(ctx: &AppContext, args: ResponderArgs) -> AppResult<()> {
    let settings = args.apply(ctx.settings.responder.clone());
    settings.validate()?;
    let session = Session::authorize(ctx).await?;
    let scheduler = responder::build(&session, &settings)?;

    tokio::select! {
        _ = scheduler.run() => {}
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("shutdown requested, stopping poll loop");
        }
    }

    Ok(())
}

pub async fn once(ctx: &AppContext, args: ResponderArgs) -> AppResult<()> {
    let settings = args.apply(ctx.settings.responder.clone());
    settings.validate()?;
    let session = Session::authorize(ctx).await?;
    let scheduler = responder::build(&session, &settings)?;

    let report = scheduler.run_cycle().await;
    ctx.output.emit(&report.summary(), &report)
}
