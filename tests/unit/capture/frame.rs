use super::*;

fn solid(w: u32, h: u32, px: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: px.repeat((w * h) as usize),
        premultiplied: false,
    }
}

#[test]
fn png_survives_decode() {
    let rgba = solid(7, 3, [0x1e, 0x1e, 0x1e, 255]);
    let frame = Frame::encode(FrameIndex(0), &rgba).unwrap();
    assert!(frame.png().starts_with(b"\x89PNG"));

    let back = frame.decode().unwrap();
    assert_eq!((back.width, back.height), (7, 3));
    assert_eq!(back.data, rgba.data);
    assert!(!back.premultiplied);
}

#[test]
fn premultiplied_input_is_stored_straight() {
    let mut rgba = solid(1, 1, [64, 32, 0, 128]);
    rgba.premultiplied = true;
    let back = Frame::encode(FrameIndex(0), &rgba)
        .unwrap()
        .decode()
        .unwrap();
    assert_eq!(back.data, vec![128, 64, 0, 128]);
}

#[test]
fn encode_rejects_short_buffer() {
    let mut rgba = solid(2, 2, [0, 0, 0, 255]);
    rgba.data.pop();
    assert!(matches!(
        Frame::encode(FrameIndex(0), &rgba),
        Err(PlaybackError::Capture(_))
    ));
}

#[test]
fn buffer_orders_and_clears() {
    let mut buf = FrameBuffer::new();
    let px = solid(2, 2, [1, 2, 3, 255]);

    for _ in 0..3 {
        let f = Frame::encode(buf.next_index(), &px).unwrap();
        buf.push(buf.session(), f).unwrap();
    }
    assert_eq!(buf.len(), 3);
    let idx: Vec<u64> = buf.frames().iter().map(|f| f.index.0).collect();
    assert_eq!(idx, vec![0, 1, 2]);

    let stale = Frame::encode(FrameIndex(1), &px).unwrap();
    assert!(buf.push(buf.session(), stale).is_err());

    let other = Frame::encode(buf.next_index(), &solid(3, 2, [0, 0, 0, 255])).unwrap();
    assert!(buf.push(buf.session(), other).is_err());

    let snap = buf.snapshot();
    let old = buf.next_slot();
    buf.clear();
    assert!(buf.is_empty());
    assert_eq!(buf.next_index(), FrameIndex(0));
    assert_eq!(snap.len(), 3);

    // A frame rendered before the clear no longer fits, even at index 0.
    assert_ne!(buf.session(), old.session);
    let late = Frame::encode(FrameIndex(0), &px).unwrap();
    assert!(buf.push(old.session, late).is_err());
    assert!(buf.is_empty());
}
