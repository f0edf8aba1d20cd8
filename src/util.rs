/// Packs boolean button values into the bytes that the roboRIO expects
///
/// Buttons are LSB 0 within each byte, and the byte holding the highest buttons comes first.
pub(crate) fn to_u8_vec(vec_in: &[bool]) -> Vec<u8> {
    let mut vec: Vec<u8> = vec_in
        .chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |byte, (bit, pressed)| byte | ((*pressed as u8) << bit))
        })
        .collect();

    vec.reverse();
    vec
}

/// Converts the given team number into a String containing the IP of the roboRIO
/// Assumes the roboRIO will exist at 10.TE.AM.2
///
/// The last two digits of the team number make up the third octet, everything before them the
/// second octet.
pub(crate) fn ip_from_team_number(team: u32) -> String {
    format!("10.{}.{}.2", team / 100, team % 100)
}
