use crate::manager::VRFKeyManager;
use crate::types::VRFInputData;
use crate::types::VrfWorkerResponse;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
#[derive(Serialize, Deserialize, Clone)]
pub struct GenerateVrfKeypairBootstrapRequest {
    /// Session identifier the generated VRF challenge (if any) is cached under.
    #[wasm_bindgen(getter_with_clone, js_name = "sessionId")]
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[wasm_bindgen(getter_with_clone, js_name = "vrfInputData")]
    #[serde(rename = "vrfInputData")]
    pub vrf_input_data: Option<VRFInputData>,
}

#[derive(Serialize)]
struct BootstrapResponse {
    #[serde(rename = "vrfPublicKey")]
    vrf_public_key: String,
    #[serde(rename = "vrfChallengeData", skip_serializing_if = "Option::is_none")]
    vrf_challenge_data: Option<crate::types::VRFChallengeData>,
}

/// Handle GENERATE_VRF_KEYPAIR_BOOTSTRAP message
pub fn handle_generate_vrf_keypair_bootstrap(
    manager: Rc<RefCell<VRFKeyManager>>,
    message_id: Option<String>,
    payload: GenerateVrfKeypairBootstrapRequest,
) -> VrfWorkerResponse {
    let mut manager_mut = manager.borrow_mut();
    debug!("Generating bootstrap VRF keypair");

    match manager_mut.generate_vrf_keypair_bootstrap(payload.vrf_input_data) {
        Ok(bootstrap_data) => {
            debug!("VRF keypair bootstrap completed successfully");
            // Cache VRF challenge for this session so future contract verification can
            // rely on worker-owned state instead of JS-provided data.
            if let Some(challenge) = bootstrap_data.vrf_challenge_data.clone() {
                manager_mut.set_challenge(&payload.session_id, challenge);
            }

            let response = BootstrapResponse {
                vrf_public_key: bootstrap_data.vrf_public_key,
                vrf_challenge_data: bootstrap_data.vrf_challenge_data,
            };

            VrfWorkerResponse::success_from(message_id, Some(response))
        }
        Err(e) => {
            error!("VRF keypair bootstrap failed: {}", e);
            VrfWorkerResponse::fail(message_id, e.to_string())
        }
    }
}
