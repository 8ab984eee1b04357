use lzkit::codec::Format;
use lzkit::{nonblocking, Lz77, Lzw, Registry};
use tokio::io::duplex;
use tokio_util::compat::{TokioAsyncReadCompatExt, TokioAsyncWriteCompatExt};

fn sample() -> Vec<u8> {
    include_bytes!("../src/window.rs").repeat(3)
}

#[tokio::test]
async fn compress_over_a_pipe() {
    let data = sample();
    let registry = Registry::default();
    let lz77 = Lz77::new();

    for &format in Format::ALL.iter() {
        let (writer, reader) = duplex(512);
        let (written, restored) = tokio::join!(
            nonblocking::compress(&lz77, format, &data[..], writer.compat_write()),
            async {
                let mut restored = Vec::new();
                let result = nonblocking::decompress(&registry, reader.compat(), &mut restored).await;
                result.map(|_| restored)
            },
        );

        assert!(written.unwrap() > 0);
        assert_eq!(restored.unwrap(), data, "{}", format.name());
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn compress_over_a_socket() {
    let data = sample();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    let sent = data.clone();
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let lzw = Lzw::new();
        nonblocking::compress(&lzw, Format::Packed, &sent[..], socket.compat_write())
            .await
            .unwrap()
    });

    let socket = tokio::net::TcpStream::connect(address).await.unwrap();
    let mut restored = Vec::new();
    let read = nonblocking::decompress(&Registry::default(), socket.compat(), &mut restored)
        .await
        .unwrap();

    assert!(server.await.unwrap() > 0);
    assert_eq!(read, data.len() as u64);
    assert_eq!(restored, data);
}
