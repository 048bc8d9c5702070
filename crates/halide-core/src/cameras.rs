use serde::Serialize;

use crate::filters::{self, FilterDescriptor};

/// A film-camera body the user can pick instead of a raw filter id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub brand: &'static str,
    pub description: &'static str,
    pub filter_id: &'static str,
}

impl CameraPreset {
    pub fn filter(&self) -> &'static FilterDescriptor {
        filters::lookup(self.filter_id)
    }
}

const fn preset(
    id: &'static str,
    name: &'static str,
    brand: &'static str,
    description: &'static str,
    filter_id: &'static str,
) -> CameraPreset {
    CameraPreset {
        id,
        name,
        brand,
        description,
        filter_id,
    }
}

static CAMERAS: [CameraPreset; 10] = [
    preset(
        "kodak-portra",
        "Portra 400",
        "Kodak",
        "Natural skin tones, warm highlights",
        "kodak-portra",
    ),
    preset(
        "fuji-superia",
        "Superia 400",
        "Fujifilm",
        "Vibrant colors, cool tones",
        "fuji-superia",
    ),
    preset(
        "cinestill-800",
        "Cinestill 800T",
        "Cinestill",
        "Cinematic tungsten, warm glow",
        "cinestill-800",
    ),
    preset(
        "ilford-bw",
        "Ilford HP5",
        "Ilford",
        "Classic black & white, high contrast",
        "ilford-bw",
    ),
    preset(
        "polaroid-600",
        "Polaroid 600",
        "Polaroid",
        "Instant film, soft pastels",
        "soft-warm",
    ),
    preset(
        "contax-t2",
        "Contax T2",
        "Contax",
        "Premium compact, clean modern",
        "clean-modern",
    ),
    preset(
        "leica-m6",
        "Leica M6",
        "Leica",
        "Legendary rangefinder, classic",
        "classic-bw",
    ),
    preset(
        "canon-ae1",
        "Canon AE-1",
        "Canon",
        "70s vintage, warm tones",
        "vintage-70s",
    ),
    preset(
        "minolta-x700",
        "Minolta X-700",
        "Minolta",
        "80s classic, retro fade",
        "retro-fade",
    ),
    preset(
        "nikon-f3",
        "Nikon F3",
        "Nikon",
        "Professional, cinematic",
        "cinematic",
    ),
];

pub fn all() -> &'static [CameraPreset] {
    &CAMERAS
}

pub fn lookup(id: &str) -> Option<&'static CameraPreset> {
    CAMERAS.iter().find(|c| c.id == id)
}
