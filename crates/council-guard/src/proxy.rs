// proxy.rs — The proxy session: subprocess plus two directional pumps.
//
// The session owns the tool-server subprocess and two tokio tasks:
//
//   inbound:  client lines → screen → child stdin (or a denial response
//             written straight back to the client)
//   outbound: child stdout lines → client, verbatim
//
// The pumps are independent; ordering is exact within each direction and
// unspecified across them. The client writer sits behind a mutex so a
// denial and a relayed response can interleave only at line granularity.
// Client EOF closes the child's stdin to signal completion. A shutdown
// future stops the child and `run` returns within a bounded grace period.

use std::future::Future;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::authorizer::{Authorizer, Disposition};
use crate::error::GuardError;

/// How long `run` waits for the tool server to exit after a termination
/// signal before giving up on it.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// One proxy session: a spawned tool server and its two I/O pumps.
pub struct ProxySession {
    child: Child,
    inbound: JoinHandle<Result<(), GuardError>>,
    outbound: JoinHandle<Result<(), GuardError>>,
}

impl ProxySession {
    /// Spawn the tool server and start both pumps.
    ///
    /// Must be called from within a tokio runtime. `command` is the argv
    /// of the backing tool server; its stderr is inherited so server
    /// diagnostics stay visible.
    pub fn spawn<R, W>(
        authorizer: Authorizer,
        command: &[String],
        client_in: R,
        client_out: W,
    ) -> Result<Self, GuardError>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (program, args) = command.split_first().ok_or(GuardError::EmptyCommand)?;
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| GuardError::Spawn {
                command: program.clone(),
                source,
            })?;

        let child_stdin = child.stdin.take().ok_or(GuardError::MissingStdin)?;
        let child_stdout = child.stdout.take().ok_or(GuardError::MissingStdout)?;
        let client_out = Arc::new(Mutex::new(client_out));

        let inbound = tokio::spawn(pump_inbound(
            authorizer,
            client_in,
            child_stdin,
            Arc::clone(&client_out),
        ));
        let outbound = tokio::spawn(pump_outbound(child_stdout, client_out));

        Ok(Self {
            child,
            inbound,
            outbound,
        })
    }

    /// Drive the session until the tool server exits or `shutdown` resolves.
    ///
    /// Returns the server's exit code when it exits on its own, or `None`
    /// when the session was shut down by the signal.
    pub async fn run<F>(self, shutdown: F) -> Result<Option<i32>, GuardError>
    where
        F: Future<Output = ()>,
    {
        let ProxySession {
            mut child,
            inbound,
            outbound,
        } = self;

        tokio::pin!(shutdown);
        tokio::select! {
            status = child.wait() => {
                let status = status?;
                // Drain whatever the server wrote on its way out, then
                // stop reading the client.
                join_pump(outbound).await;
                inbound.abort();
                join_pump(inbound).await;
                tracing::info!(code = ?status.code(), "tool server exited");
                Ok(status.code())
            }
            _ = &mut shutdown => {
                tracing::info!("termination signal received; stopping tool server");
                inbound.abort();
                outbound.abort();
                join_pump(inbound).await;
                join_pump(outbound).await;
                terminate(&mut child).await;
                Ok(None)
            }
        }
    }
}

/// Client → server pump. Screens every line; denied lines are answered on
/// the client writer and never reach the child.
async fn pump_inbound<R, W>(
    authorizer: Authorizer,
    client_in: R,
    mut child_stdin: ChildStdin,
    client_out: Arc<Mutex<W>>,
) -> Result<(), GuardError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(client_in).lines();
    while let Some(line) = lines.next_line().await? {
        match authorizer.screen(&line) {
            Disposition::Forward => {
                write_line(&mut child_stdin, &line).await?;
            }
            Disposition::Deny(response) => {
                let mut out = client_out.lock().await;
                write_line(&mut *out, &response).await?;
            }
        }
    }
    // Client input is done; close the server's stdin to signal completion.
    child_stdin.shutdown().await?;
    Ok(())
}

/// Server → client pump. Verbatim, order-preserving.
async fn pump_outbound<W>(
    child_stdout: ChildStdout,
    client_out: Arc<Mutex<W>>,
) -> Result<(), GuardError>
where
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(child_stdout).lines();
    while let Some(line) = lines.next_line().await? {
        let mut out = client_out.lock().await;
        write_line(&mut *out, &line).await?;
    }
    Ok(())
}

async fn write_line<W>(writer: &mut W, line: &str) -> Result<(), GuardError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// Stop the tool server, waiting up to the grace period for it to go away.
async fn terminate(child: &mut Child) {
    if let Err(error) = child.start_kill() {
        tracing::warn!(%error, "failed to signal tool server");
        return;
    }
    if tokio::time::timeout(SHUTDOWN_GRACE, child.wait()).await.is_err() {
        tracing::warn!("tool server did not exit within the shutdown grace period");
    }
}

/// Await a pump, logging rather than propagating its outcome. A pump that
/// dies with an I/O error (the far side closed first) is a normal way for
/// a session to wind down.
async fn join_pump(handle: JoinHandle<Result<(), GuardError>>) {
    match handle.await {
        Ok(Ok(())) => {}
        Ok(Err(error)) => tracing::debug!(%error, "proxy pump ended with I/O error"),
        Err(join_error) if join_error.is_cancelled() => {}
        Err(join_error) => tracing::warn!(%join_error, "proxy pump panicked"),
    }
}
