//! 整幅图像编解码集成测试.

use composite::codec::WriterSink;
use composite::raster::{decode_image, encode_image};
use image::{GrayImage, Rgb, RgbImage};

const COLOR: [u8; 3] = [153, 128, 102];

#[test]
fn test_纯色图像往返() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (w, h) = (64u32, 10u32);
    let image = RgbImage::from_pixel(w, h, Rgb(COLOR));
    let encoded = encode_image(&image, None).unwrap();
    assert_eq!(encoded.dimensions(), (w, h));

    for harmonic in [false, true] {
        let decoded = decode_image(&encoded, harmonic, None).unwrap();
        for x in w / 4..w * 3 / 4 {
            let px = decoded.get_pixel(x, h - 1).0;
            for c in 0..3 {
                let diff = (px[c] as i32 - COLOR[c] as i32).abs();
                assert!(diff <= 13, "谐波={harmonic}, 像素 {x} 通道 {c}: {px:?}");
            }
        }
    }
}

#[test]
fn test_编码结果含载波() {
    // 有色输入的复合信号在行内起伏, 相邻行反相
    let image = RgbImage::from_pixel(64, 6, Rgb([220, 40, 40]));
    let encoded = encode_image(&image, None).unwrap();
    let row = |y: u32| -> Vec<i32> {
        (0..64)
            .map(|x| encoded.get_pixel(x, y).0[0] as i32)
            .collect()
    };

    let r4 = row(4);
    let r5 = row(5);
    let spread = r4[16..48].iter().max().unwrap() - r4[16..48].iter().min().unwrap();
    assert!(spread > 20, "载波幅度过小: {spread}");
    let differs = r4.iter().zip(&r5).filter(|(a, b)| (*a - *b).abs() > 10).count();
    assert!(differs > 16);
}

#[test]
fn test_诊断输出写入接收端() {
    let image = GrayImage::new(100, 2);
    let (tx, rx) = std::sync::mpsc::channel::<String>();

    struct ChannelSink(std::sync::mpsc::Sender<String>);
    impl composite::codec::DiagnosticSink for ChannelSink {
        fn line(&mut self, text: &str) {
            self.0.send(text.to_string()).unwrap();
        }
    }

    decode_image(&image, false, Some(Box::new(ChannelSink(tx)))).unwrap();
    let lines: Vec<String> = rx.try_iter().collect();
    assert_eq!(
        lines,
        [
            "Width: 100 pixels",
            "Carrier: period is 2.898551 pixels (0.690000 of Fmax)",
        ]
    );

    // WriterSink 同样可用
    let sink = WriterSink::new(std::io::sink());
    assert!(encode_image(&RgbImage::new(8, 1), Some(Box::new(sink))).is_ok());
}
