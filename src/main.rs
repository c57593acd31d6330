// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::Parser;
use nodepath_provisioner::cli::{CliArgs, Commands};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = CliArgs::parse();

    // Interrupts stop helper pod waits so the pods get deleted before exit
    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_shutdown(cancel.clone()));

    match args.command {
        Commands::Provision(cmd) => cmd.execute(&cancel).await,
        Commands::Delete(cmd) => cmd.execute(&cancel).await,
        Commands::Inspect(cmd) => until_cancelled(cmd.execute(), &cancel).await,
        Commands::List(cmd) => until_cancelled(cmd.execute(), &cancel).await,
    }
}

async fn cancel_on_shutdown(cancel: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("Shutdown signal received");
    cancel.cancel();
}

async fn until_cancelled(
    command: impl std::future::Future<Output = anyhow::Result<()>>,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    tokio::select! {
        result = command => result,
        _ = cancel.cancelled() => anyhow::bail!("Interrupted"),
    }
}
