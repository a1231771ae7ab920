//! HTTP server.
//!
//! Listens for requests and maps them to a handler, if any exists for the specified path.
//! If no handler is matched, return `404 - Not Found`. Every response leaving the server
//! carries the configured `Access-Control-Allow-Origin` header.

use super::{Error, Method, Request, Response, Router};
use crate::colors::MaybeColorize;
use crate::config::Config;
use crate::controller::middleware::cors::allow_origin;

use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter, ReadBuf};
use tokio::net::{TcpListener, TcpStream};
use tokio::select;
use tokio::signal::ctrl_c;
use tokio_rustls::{server::TlsStream, TlsAcceptor};
use tracing::{debug, error, info, warn};

/// Type of TCP connection used by the client.
enum Conn {
    Plain(BufReader<BufWriter<TcpStream>>),
    Tls(Box<BufReader<BufWriter<TlsStream<TcpStream>>>>),
}

impl From<TcpStream> for Conn {
    fn from(value: TcpStream) -> Self {
        Self::Plain(BufReader::new(BufWriter::new(value)))
    }
}

impl From<TlsStream<TcpStream>> for Conn {
    fn from(value: TlsStream<TcpStream>) -> Self {
        Self::Tls(Box::new(BufReader::new(BufWriter::new(value))))
    }
}

impl AsyncRead for Conn {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            Conn::Plain(s) => Pin::new(s).poll_read(cx, buf),
            Conn::Tls(s) => Pin::new(s.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for Conn {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<Result<usize, std::io::Error>> {
        match self.get_mut() {
            Conn::Plain(s) => Pin::new(s).poll_write(cx, buf),
            Conn::Tls(s) => Pin::new(s.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), std::io::Error>> {
        match self.get_mut() {
            Conn::Plain(s) => Pin::new(s).poll_flush(cx),
            Conn::Tls(s) => Pin::new(s.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<(), std::io::Error>> {
        match self.get_mut() {
            Conn::Plain(s) => Pin::new(s).poll_shutdown(cx),
            Conn::Tls(s) => Pin::new(s.as_mut()).poll_shutdown(cx),
        }
    }
}

/// HTTP server.
pub struct Server {
    router: Arc<Router>,
    config: Arc<Config>,
}

impl Server {
    /// Create new HTTP server from the configuration and the routes it serves.
    pub fn new(config: Arc<Config>, handlers: Vec<super::Handler>) -> Result<Self, Error> {
        Ok(Server {
            router: Arc::new(Router::new(handlers)?),
            config,
        })
    }

    fn tls_acceptor(config: &Config) -> Result<Option<TlsAcceptor>, Error> {
        match (&config.cert_file, &config.key_file) {
            (Some(cert_file), Some(key_file)) => {
                let cert =
                    CertificateDer::pem_file_iter(cert_file)?.collect::<Result<Vec<_>, _>>()?;
                let key = PrivateKeyDer::from_pem_file(key_file)?;
                let config = rustls::ServerConfig::builder()
                    .with_no_client_auth()
                    .with_single_cert(cert, key)?;
                Ok(Some(TlsAcceptor::from(Arc::new(config))))
            }

            (Some(_), None) | (None, Some(_)) => {
                warn!("Both cert_file and key_file are required for TLS, serving plain HTTP");
                Ok(None)
            }

            (None, None) => Ok(None),
        }
    }

    /// Launch the server. This blocks until the server is shut down (`SIGINT`/Ctrl-C).
    pub async fn launch(self) -> Result<(), Error> {
        info!(
            "Starting {} {} {}",
            "Medport".green(),
            "HTTP".purple(),
            "server".red()
        );

        self.router.log_routes();

        let listener = TcpListener::bind(self.config.addr()).await?;
        let acceptor = Arc::new(Self::tls_acceptor(&self.config)?);

        info!(
            "Listening on {}{}",
            listener.local_addr()?,
            if acceptor.is_some() { " (tls)" } else { "" }
        );

        loop {
            select! {
                _ = ctrl_c() => {
                    info!("Shutting down...");
                    return Ok(());
                }

                result = listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            let router = self.router.clone();
                            let config = self.config.clone();
                            let acceptor = acceptor.clone();

                            tokio::spawn(async move {
                                Self::handle_connection(router, config, stream, acceptor, peer_addr).await;
                            });
                        }

                        Err(err) => error!("accept error: {}", err),
                    }
                }
            }
        }
    }

    async fn handle_connection(
        router: Arc<Router>,
        config: Arc<Config>,
        stream: TcpStream,
        tls_acceptor: Arc<Option<TlsAcceptor>>,
        peer_addr: SocketAddr,
    ) {
        let mut stream = match tls_acceptor.as_ref() {
            Some(acceptor) => match acceptor.accept(stream).await {
                Ok(stream) => Conn::from(stream),
                Err(err) => {
                    debug!("{} tls handshake with {:?} failed: {}", "http".purple(), peer_addr, err);
                    return;
                }
            },
            None => Conn::from(stream),
        };
        debug!("{} new connection from {:?}", "http".purple(), peer_addr);

        Self::serve(&router, &config, &mut stream, peer_addr).await;
    }

    /// Answer requests on one connection until the client is done with it.
    async fn serve(
        router: &Router,
        config: &Config,
        mut stream: impl AsyncRead + AsyncWrite + Unpin,
        peer_addr: SocketAddr,
    ) {
        loop {
            let request = match Request::read(peer_addr, &mut stream, config.limits()).await {
                Ok(request) => request,
                Err(err) => {
                    if let Error::ContentTooLarge(ref head) = err {
                        let response =
                            allow_origin(Response::content_too_large(), &config.allowed_origin);

                        info!(
                            "{} {} {} 413",
                            head.method().to_string().purple(),
                            head.path().base().purple(),
                            std::any::type_name::<Self>().green(),
                        );

                        let head_only = head.method() == &Method::Head;
                        let _ = Self::send_response(&mut stream, response, head_only).await;
                    }

                    debug!(
                        "{} client {:?} disconnected: {}",
                        "http".purple(),
                        peer_addr,
                        err
                    );
                    return;
                }
            };

            let keep_alive = request.keep_alive();
            let head_only = request.method() == &Method::Head;
            let response = Self::dispatch(router, config, request).await;

            if let Err(err) = Self::send_response(&mut stream, response, head_only).await {
                debug!("{} error {:?}", peer_addr, err);
                break;
            }

            if !keep_alive {
                break;
            }
        }
    }

    /// Route the request to its controller and produce the response.
    pub async fn handle(&self, request: Request) -> Response {
        Self::dispatch(&self.router, &self.config, request).await
    }

    async fn dispatch(router: &Router, config: &Config, request: Request) -> Response {
        let start = Instant::now();

        let (response, controller_name) = match router.find(request.path()) {
            Some(handler) => {
                // Set the matching regex to extract parameters.
                let request = request.clone().with_params(handler.path_with_regex().params());

                let response = match handler.handle_internal(request).await {
                    Ok(response) => response,
                    Err(err) => {
                        error!("{}", err);
                        Response::internal_error()
                    }
                };

                (response, handler.controller_name())
            }

            None => (Response::not_found(), std::any::type_name::<Self>()),
        };

        let response = allow_origin(response, &config.allowed_origin);

        // We include the time to find the handler in the duration.
        Self::log(&request, controller_name, &response, start.elapsed());

        response
    }

    fn log(request: &Request, controller_name: &str, response: &Response, duration: Duration) {
        let method = request.method().to_string();
        let path = request.path().path();
        let code = response.status().code();
        let duration = (duration.as_secs_f64() * 1000.0) as f32;

        info!(
            "{} {} {} {} ({:.3} ms)",
            method.purple(),
            path.purple(),
            controller_name.green(),
            code,
            duration,
        );
    }

    async fn send_response(
        mut stream: impl AsyncWrite + Unpin,
        response: Response,
        head_only: bool,
    ) -> Result<(), Error> {
        if head_only {
            response.send_head(&mut stream).await?;
        } else {
            response.send(&mut stream).await?;
        }
        stream.flush().await?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::async_trait;
    use crate::controller::{Controller, Error as ControllerError};
    use crate::http::request::test::request;
    use crate::http::Handler;
    use tokio::io::{duplex, AsyncReadExt};

    struct Failing;

    #[async_trait]
    impl Controller for Failing {
        async fn handle(&self, _request: &Request) -> Result<Response, ControllerError> {
            Err(ControllerError::new(std::io::Error::other("disk on fire")))
        }
    }

    fn server(origin: &str) -> Server {
        let mut config = Config::default();
        config.allowed_origin = origin.into();

        Server::new(
            Arc::new(config),
            vec![Handler::route("/fail", Failing).unwrap()],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_not_found() {
        let server = server("https://portal.example");
        let response = server
            .handle(request("GET", "/unknown", &[], "").await.unwrap())
            .await;

        assert_eq!(response.status().code(), 404);
        assert_eq!(response.body_bytes(), b"Not Found");
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "https://portal.example"
        );
    }

    #[tokio::test]
    async fn test_controller_error_is_hidden() {
        let server = server("*");
        let response = server
            .handle(request("GET", "/fail", &[], "").await.unwrap())
            .await;

        assert_eq!(response.status().code(), 500);
        assert!(!String::from_utf8_lossy(response.body_bytes()).contains("disk on fire"));
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }

    /// Run one client conversation over an in-memory connection, returning all it received.
    async fn converse(server: &Server, raw: &str) -> String {
        let (mut client, connection) = duplex(64 * 1024);
        let peer = "127.0.0.1:1337".parse().unwrap();

        client.write_all(raw.as_bytes()).await.unwrap();
        Server::serve(&server.router, &server.config, connection, peer).await;

        let mut received = String::new();
        client.read_to_string(&mut received).await.unwrap();
        received
    }

    #[tokio::test]
    async fn test_content_too_large() {
        let server = server("https://portal.example");
        let raw = "POST /contact HTTP/1.1\r\nContent-Length: 1000000\r\n\r\n{\"name\":";

        let received = converse(&server, raw).await;

        assert!(received.starts_with("HTTP/1.1 413 Payload Too Large\r\n"));
        assert!(received.contains("access-control-allow-origin: https://portal.example\r\n"));
        assert!(received.contains("connection: close\r\n"));
        // Nothing after the 413, the connection is closed.
        assert_eq!(received.matches("HTTP/1.1").count(), 1);
    }

    #[tokio::test]
    async fn test_keep_alive_and_head() {
        let server = server("*");
        let raw = "HEAD /unknown HTTP/1.1\r\n\r\n".to_owned()
            + "GET /unknown HTTP/1.1\r\nConnection: close\r\n\r\n";

        let received = converse(&server, &raw).await;
        let responses = received.split("HTTP/1.1 404 Not Found\r\n").collect::<Vec<_>>();

        assert_eq!(responses.len(), 3);
        assert!(responses[1].contains("content-length: 9\r\n"));
        assert!(responses[1].ends_with("\r\n\r\n"));
        assert!(responses[2].ends_with("\r\n\r\nNot Found"));
    }
}
