use std::{
    io,
    net::{ToSocketAddrs, UdpSocket},
};

/// Streams float waves as little endian f32 datagrams to a scope tool.
pub struct UdpScope {
    socket: UdpSocket,
    addr: std::net::SocketAddr,
}

impl UdpScope {
    pub fn new<A: ToSocketAddrs>(addr: A) -> io::Result<UdpScope> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no scope address"))?;
        let socket = UdpSocket::bind("0.0.0.0:0")?;

        Ok(UdpScope { socket, addr })
    }

    pub fn send_wave(&self, floats: &[f32]) -> io::Result<()> {
        let buf: Vec<u8> = floats.iter().flat_map(|f| f.to_le_bytes()).collect();
        self.socket.send_to(&buf, self.addr)?;
        Ok(())
    }
}
