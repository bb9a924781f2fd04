#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: ([[u8; 4]; 16], [u8; 16], bool, bool)| {
    let (rgba, raw_weights, three_color_mode, high_quality) = input;

    let colors = rgba.map(|p| p.map(|v| v as f32 / 255.0));
    let weights = raw_weights.map(|w| w as f32 / 255.0);

    let (block, error) = bc1::compress_bc1_block(
        &colors,
        &weights,
        [1.0, 1.0, 1.0],
        bc1::Bc1Options {
            three_color_mode,
            high_quality,
        },
    );

    assert!(error >= 0.0);
    if !three_color_mode {
        let c0 = u16::from_le_bytes([block[0], block[1]]);
        let c1 = u16::from_le_bytes([block[2], block[3]]);
        assert!(c0 >= c1);
    }

    // decoding and re-evaluating must agree with the reported error when all
    // weights are 1, but any input must at least decode without panicking
    let _ = bc1::decode_bc1_block(&block, bc1::Decoder::Reference);
    let _ = bc1::evaluate_bc1_error(&rgba, &block, bc1::Decoder::Nvidia);
    let _ = bc1::evaluate_bc1_error(&rgba, &block, bc1::Decoder::Amd);

    let _ = bc1::compress_bc1_block_fast(&colors, &weights, [1.0, 1.0, 1.0]);
    let _ = bc1::compress_bc1_block_fast_u8(&rgba);
});
