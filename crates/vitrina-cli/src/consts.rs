/// First port tried by the preview server.
pub const PORT: u16 = 4173;
