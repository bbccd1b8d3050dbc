//! Basic usage of boundary-guarded transforms.

use boundary_guard::{
    ColorSpace, ColorTransform, FnTransform, FormatWord, GuardContext, GuardedTransform,
    TransformId,
};

fn rgb_to_cmyk(src: &[u8], dst: &mut [u8]) {
    let max = src[0].max(src[1]).max(src[2]);
    for c in 0..3 {
        dst[c] = if max == 0 {
            0
        } else {
            ((max - src[c]) as u32 * 255 / max as u32) as u8
        };
    }
    dst[3] = 255 - max;
}

fn main() -> Result<(), boundary_guard::ConfigurationError> {
    env_logger::init();

    let rgb8 = FormatWord::new().with_channels(3).with_bytes(1);
    let cmyk8 = FormatWord::new().with_channels(4).with_bytes(1);
    let transform = FnTransform::new(TransformId(1), rgb8, cmyk8, rgb_to_cmyk);

    let mut ctx = GuardContext::from_env();
    println!("classifier: {:?}", ctx.classifier());

    // Direct guarded transform
    println!("=== Guarded RGB -> CMYK ===");
    ctx.register(&transform)?;
    let input = [0, 0, 0, 255, 255, 255, 10, 20, 30, 0, 0, 0];
    let mut output = [0u8; 16];
    let stats = ctx.do_transform(&transform, &input, &mut output, 4);
    for (i, px) in output.chunks_exact(4).enumerate() {
        println!("pixel {i}: {:?}", px);
    }
    println!("{stats:?}");

    // Compare with the plain transform
    let mut plain = [0u8; 16];
    transform.do_transform(&input, &mut plain, 4);
    println!("matches plain transform: {}", plain == output);

    // Lab sentinel correction through the full pipeline
    println!("\n=== Lab -> RGB with mask sentinel ===");
    let lab8 = FormatWord::new()
        .with_channels(3)
        .with_bytes(1)
        .with_color_space(ColorSpace::Lab);
    let lab_to_rgb = FnTransform::new(TransformId(2), lab8, rgb8, |src: &[u8], dst: &mut [u8]| {
        dst.fill(src[0]);
    });
    let guarded = GuardedTransform::new(&mut ctx, lab_to_rgb, true)?;
    let mut lab = [0, 0, 0, 80, 128, 128, 0, 0, 0];
    let mut rgb = [0u8; 9];
    let stats = guarded.apply(&ctx, &mut lab, &mut rgb, 3);
    println!("input after correction: {:?}", lab);
    println!("output: {:?}", rgb);
    println!("{stats:?}");
    guarded.release(&mut ctx);

    Ok(())
}
