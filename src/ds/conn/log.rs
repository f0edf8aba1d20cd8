use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;

use bytes::BytesMut;
use crossbeam_channel::Receiver;
use smallvec::SmallVec;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, info, warn};

use super::backoff::ExponentialBackoff;
use super::{stopped, wait};
use crate::config::DsConfig;
use crate::ds::state::{DsState, LinkCounters};
use crate::ds::target::TargetSpec;
use crate::proto::tcp::inbound::TcpPacket;
use crate::proto::tcp::DsTcpCodec;

const READ_CHUNK: usize = 1024;

struct Connection {
    stream: TcpStream,
    epoch: u64,
    buf: BytesMut,
}

/// What a read on the connection turned up
enum ReadOutcome {
    Data,
    Idle,
    Closed,
}

fn resolve(target: &TargetSpec, port: u16) -> io::Result<SocketAddr> {
    (target.host().as_str(), port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no address for target"))
}

/// Client side of the roboRIO's log stream
struct LogClient {
    state: Arc<DsState>,
    config: DsConfig,
    conn: Option<Connection>,
    backoff: ExponentialBackoff,
}

impl LogClient {
    fn new(state: Arc<DsState>, config: DsConfig) -> LogClient {
        LogClient {
            backoff: ExponentialBackoff::new(config.max_backoff),
            state,
            config,
            conn: None,
        }
    }

    fn connect(&mut self, target: &TargetSpec, epoch: u64) -> io::Result<()> {
        let addr = resolve(target, self.config.log_port)?;
        let stream = TcpStream::connect_timeout(&addr, self.config.connect_timeout)?;
        stream.set_read_timeout(Some(self.config.read_timeout))?;
        stream.set_nodelay(true)?;

        info!("Connected to the log stream at {}", addr);
        self.state.tcp().resend_game_data();
        self.conn = Some(Connection {
            stream,
            epoch,
            buf: BytesMut::with_capacity(READ_CHUNK),
        });
        Ok(())
    }

    fn disconnect(&mut self, reason: &str) {
        if self.conn.take().is_some() {
            info!("Log connection closed: {}", reason);
        }
    }

    /// Sends the game data if it changed since it was last sent
    fn flush_game_data(&mut self) -> io::Result<()> {
        let conn = match self.conn {
            Some(ref mut conn) => conn,
            None => return Ok(()),
        };
        let tag = match self.state.tcp().take_pending_tag() {
            Some(tag) => tag,
            None => return Ok(()),
        };

        let mut out = BytesMut::new();
        DsTcpCodec
            .encode(tag, &mut out)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        conn.stream.write_all(&out)?;
        debug!("Sent game data");
        Ok(())
    }

    fn read(&mut self) -> io::Result<ReadOutcome> {
        let conn = match self.conn {
            Some(ref mut conn) => conn,
            None => return Ok(ReadOutcome::Idle),
        };

        let mut chunk: SmallVec<[u8; READ_CHUNK]> = smallvec![0u8; READ_CHUNK];
        let n = match conn.stream.read(&mut chunk) {
            Ok(0) => return Ok(ReadOutcome::Closed),
            Ok(n) => n,
            Err(ref e)
                if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut =>
            {
                return Ok(ReadOutcome::Idle)
            }
            Err(e) => return Err(e),
        };
        conn.buf.extend_from_slice(&chunk[..n]);

        loop {
            match DsTcpCodec.decode(&mut conn.buf) {
                Ok(Some(TcpPacket::Other(id))) => debug!("Ignoring log frame {:#04x}", id),
                Ok(Some(packet)) => self.state.consume_log(&packet),
                Ok(None) => break,
                Err(e) => {
                    LinkCounters::bump(&self.state.counters().decode_errors);
                    debug!("Dropping log frame: {}", e);
                }
            }
        }

        Ok(ReadOutcome::Data)
    }

    /// Runs one iteration, returning false when there was no connection to block on
    fn step(&mut self) -> bool {
        let (target, epoch) = self.state.target();
        let link_up = self.state.recv().connected();

        match self.conn.as_ref().map(|conn| conn.epoch == epoch) {
            Some(false) => self.disconnect("target changed"),
            Some(true) if !link_up => self.disconnect("roboRIO went away"),
            _ => {}
        }

        if self.conn.is_none() {
            if !link_up || !self.backoff.ready() {
                return false;
            }
            if let Err(e) = self.connect(&target, epoch) {
                if self.backoff.failed() {
                    warn!("Couldn't connect to the log stream on {}: {}", target, e);
                } else {
                    debug!("Couldn't connect to the log stream on {}: {}", target, e);
                }
                return false;
            }
            self.backoff.reset();
        }

        if let Err(e) = self.flush_game_data() {
            warn!("Failed to send game data: {}", e);
            // Sent again on the next connection
            self.disconnect("write failed");
            self.backoff.failed();
            return false;
        }

        match self.read() {
            Ok(ReadOutcome::Data) | Ok(ReadOutcome::Idle) => {}
            Ok(ReadOutcome::Closed) => {
                self.disconnect("closed by the roboRIO");
                self.backoff.failed();
            }
            Err(e) => {
                self.disconnect(&e.to_string());
                self.backoff.failed();
            }
        }
        true
    }
}

/// Follows the roboRIO's log stream until `shutdown` disconnects
pub(crate) fn log_thread(state: Arc<DsState>, config: DsConfig, shutdown: Receiver<()>) {
    let idle = config.read_timeout;
    let mut client = LogClient::new(state, config);

    while !stopped(&shutdown) {
        if !client.step() && wait(&shutdown, idle) {
            break;
        }
    }

    client.disconnect("shutting down");
    info!("Log thread stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::udp::outbound::types::Alliance;
    use bytes::BufMut;
    use std::net::TcpListener;
    use std::sync::Mutex;
    use std::time::Duration;

    fn stdout_frame(message: &str) -> Vec<u8> {
        let mut buf = vec![];
        buf.put_u16((1 + 4 + 2 + message.len()) as u16);
        buf.put_u8(0x0c);
        buf.put_f32(0.5);
        buf.put_u16(1);
        buf.put_slice(message.as_bytes());
        buf
    }

    fn client(port: u16) -> LogClient {
        let state = Arc::new(DsState::new(
            Alliance::new_red(1),
            4069,
            Some("127.0.0.1".to_string()),
        ));
        let config = DsConfig::default()
            .with_ports(0, 0, port)
            .with_sim_port(None);
        LogClient::new(state, config)
    }

    #[test]
    fn waits_for_the_status_link() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut client = client(listener.local_addr().unwrap().port());

        assert!(!client.step());
        assert!(client.conn.is_none());
    }

    #[test]
    fn sends_game_data_and_forwards_stdout() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut client = client(listener.local_addr().unwrap().port());

        let seen = Arc::new(Mutex::new(vec![]));
        let sink = seen.clone();
        client.state.log_sink().set_consumer(move |packet| {
            if let TcpPacket::Stdout(stdout) = packet {
                sink.lock().unwrap().push(stdout.message.clone());
            }
        });
        client.state.tcp().set_game_data("LRL".to_string());
        client.state.recv().set_connected(true);

        assert!(client.step());
        assert!(client.conn.is_some());

        let (mut rio, _) = listener.accept().unwrap();
        rio.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let mut gsm = [0u8; 6];
        rio.read_exact(&mut gsm).unwrap();
        assert_eq!(gsm, [0x00, 0x04, 0x0e, b'L', b'R', b'L']);

        let mut frames = stdout_frame("hello");
        // an unknown tag is skipped without disturbing the stream
        frames.extend(&[0x00, 0x02, 0x0a, 0xff]);
        frames.extend(stdout_frame("world"));
        rio.write_all(&frames).unwrap();

        for _ in 0..20 {
            client.step();
            if seen.lock().unwrap().len() == 2 {
                break;
            }
        }
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["hello".to_string(), "world".to_string()]
        );
    }

    #[test]
    fn consumer_swapped_from_its_own_callback() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut client = client(listener.local_addr().unwrap().port());

        let seen = Arc::new(Mutex::new(vec![]));
        let (state, lines) = (client.state.clone(), seen.clone());
        client.state.log_sink().set_consumer(move |_| {
            let lines = lines.clone();
            state.log_sink().set_consumer(move |packet| {
                if let TcpPacket::Stdout(stdout) = packet {
                    lines.lock().unwrap().push(stdout.message.clone());
                }
            });
        });
        client.state.recv().set_connected(true);
        assert!(client.step());

        let (mut rio, _) = listener.accept().unwrap();
        let mut frames = stdout_frame("first");
        frames.extend(stdout_frame("second"));
        rio.write_all(&frames).unwrap();

        for _ in 0..20 {
            client.step();
            if !seen.lock().unwrap().is_empty() {
                break;
            }
        }
        assert_eq!(*seen.lock().unwrap(), vec!["second".to_string()]);
    }

    #[test]
    fn drops_connection_when_link_goes_down() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut client = client(listener.local_addr().unwrap().port());
        client.state.recv().set_connected(true);
        assert!(client.step());
        let _rio = listener.accept().unwrap();

        client.state.recv().reset();
        assert!(!client.step());
        assert!(client.conn.is_none());
    }

    #[test]
    fn closed_stream_reconnects_later() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut client = client(listener.local_addr().unwrap().port());
        client.state.recv().set_connected(true);
        assert!(client.step());

        let (rio, _) = listener.accept().unwrap();
        drop(rio);

        for _ in 0..20 {
            client.step();
            if client.conn.is_none() {
                break;
            }
        }
        assert!(client.conn.is_none());
        // backing off after the loss
        assert!(!client.backoff.ready());
    }
}
