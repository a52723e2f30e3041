/// Separable box blur over packed RGBA bytes.
///
/// Pixels outside the buffer count as transparent, so content fades out at
/// the edges. Several passes approximate a gaussian.
pub(crate) fn box_blur(
    data: &mut [u8],
    width: usize,
    height: usize,
    radius_x: usize,
    radius_y: usize,
    passes: usize,
) {
    if width == 0 || height == 0 || data.len() < width * height * 4 {
        return;
    }
    let mut scratch = vec![0u8; width * height * 4];
    for _ in 0..passes {
        if radius_x > 0 {
            blur_pass(data, &mut scratch, width, height, radius_x, true);
        }
        if radius_y > 0 {
            blur_pass(data, &mut scratch, width, height, radius_y, false);
        }
    }
}

fn blur_pass(
    data: &mut [u8],
    scratch: &mut [u8],
    width: usize,
    height: usize,
    radius: usize,
    horizontal: bool,
) {
    let (lines, len) = if horizontal {
        (height, width)
    } else {
        (width, height)
    };
    let index = |line: usize, i: usize| {
        if horizontal {
            (line * width + i) * 4
        } else {
            (i * width + line) * 4
        }
    };
    let window = (2 * radius + 1) as u32;

    for line in 0..lines {
        let mut sums = [0u32; 4];
        for i in 0..=radius.min(len - 1) {
            let at = index(line, i);
            for (c, sum) in sums.iter_mut().enumerate() {
                *sum += u32::from(data[at + c]);
            }
        }
        for i in 0..len {
            let at = index(line, i);
            for (c, sum) in sums.iter().enumerate() {
                scratch[at + c] = (sum / window) as u8;
            }
            let incoming = i + radius + 1;
            if incoming < len {
                let at = index(line, incoming);
                for (c, sum) in sums.iter_mut().enumerate() {
                    *sum += u32::from(data[at + c]);
                }
            }
            if i >= radius {
                let at = index(line, i - radius);
                for (c, sum) in sums.iter_mut().enumerate() {
                    *sum -= u32::from(data[at + c]);
                }
            }
        }
    }
    data[..scratch.len()].copy_from_slice(scratch);
}
