use crate::cli::GlobalFlags;
use crate::cli::root_commands::WatchArgs;
use crate::context::AppContext;
use crate::output::output;

/// Print the current snapshot, then every published change until Ctrl-C or
/// `--count` snapshots have been printed.
pub async fn handle(args: &WatchArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    if args.count == Some(0) {
        return Ok(());
    }

    let mut rx = ctx.manager.watch();
    let mut printed = 0usize;

    let current = rx.borrow_and_update().clone();
    output(&current, flags.format)?;
    printed += 1;

    while args.count.is_none_or(|count| printed < count) {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                output(&snapshot, flags.format)?;
                printed += 1;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!(printed, "watch interrupted");
                break;
            }
        }
    }

    Ok(())
}
